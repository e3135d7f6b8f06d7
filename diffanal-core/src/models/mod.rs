pub mod counts;

// re-export for cleaner imports
pub use self::counts::ConditionCounts;
