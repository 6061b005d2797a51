pub mod sheets;
pub mod store;
pub mod workbook;

#[cfg(test)]
pub mod memory;
