pub mod directory;
pub mod memory;
pub mod supabase;

pub use directory::PatientDirectory;
pub use memory::InMemoryPatientDirectory;
pub use supabase::SupabasePatientDirectory;
