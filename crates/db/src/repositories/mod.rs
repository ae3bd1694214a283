//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod batch_repo;
pub mod customer_repo;
pub mod image_repo;
pub mod message_repo;

pub use batch_repo::BatchRepo;
pub use customer_repo::CustomerRepo;
pub use image_repo::ImageRepo;
pub use message_repo::MessageRepo;

/// `$start, $start+1, ...` placeholders for `count` consecutive binds.
pub(crate) fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|n| format!("${n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_consecutive() {
        assert_eq!(placeholders(2, 3), "$2, $3, $4");
    }
}
