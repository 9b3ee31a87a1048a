// All repository functions are generic over `R: FlashcardRepository` so they
// accept both the real `CardStore` and in-memory test doubles.

pub mod review;
pub mod transfer;
