pub mod common;

#[cfg(test)]
mod keeper_lifecycle;
