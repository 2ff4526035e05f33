pub(crate) use clean::Clean;
pub(crate) use completions::Completions;
pub(crate) use config::Config;
pub(crate) use fetch::Fetch;
pub(crate) use init::Init;
pub(crate) use render::Render;
pub(crate) use status::Status;
pub(crate) use words::Words;

mod clean;
mod completions;
mod config;
mod fetch;
mod init;
mod render;
mod status;
mod words;
