mod common;
mod scoring;
mod session;
