use std::time::Instant;

use casebook::RenderHandle;

use crate::app::HostOps;

/// Bridges application requests onto the toolkit runtime.
#[derive(Clone)]
pub struct RuntimeController {
    render: RenderHandle,
}

impl RuntimeController {
    pub fn new(render: RenderHandle) -> Self {
        Self { render }
    }

    pub fn render_handle(&self) -> RenderHandle {
        self.render.clone()
    }
}

impl HostOps for RuntimeController {
    fn request_render(&mut self) {
        self.render.request_render();
    }

    fn request_render_at(&mut self, deadline: Instant) {
        self.render.request_render_at(deadline);
    }

    fn request_stop(&mut self) {
        tracing::info!("quit requested");
        self.render.request_stop();
    }
}
