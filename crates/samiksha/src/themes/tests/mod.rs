mod common;
mod decoder;
