mod server;

pub use server::MinecraftServer;
