pub mod errors;
pub mod patente;

#[cfg(test)]
pub mod test_support;
