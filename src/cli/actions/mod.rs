use crate::cli::globals::GlobalArgs;

pub mod server;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        globals: GlobalArgs,
    },
}
