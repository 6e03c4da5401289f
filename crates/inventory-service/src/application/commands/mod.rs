mod allocate_inventory;
mod create_product;

pub use allocate_inventory::{AllocateInventoryInput, AllocationResult};
pub use create_product::CreateProductInput;
