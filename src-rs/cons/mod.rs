pub mod model_cons;
pub mod provider_cons;
