/// Database models
///
/// Each model owns its table's queries: a row struct, `Create*` /
/// `Update*` input structs, and async CRUD methods over the pool.

pub mod project;
pub mod task;
pub mod user;
