pub mod config;
pub mod xmidi;

#[cfg(test)]
mod testing;
