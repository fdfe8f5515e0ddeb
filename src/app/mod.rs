pub mod applications;
pub mod codes;
pub mod interests;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;
