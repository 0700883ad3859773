/// Authenticated request pipeline - Gateway

mod pipeline;

pub use pipeline::AuthPipeline;
