pub mod booking;
pub mod lifecycle;
pub mod memory;
pub mod slots;
pub mod store;
pub mod supabase;

pub use booking::BookingService;
pub use lifecycle::SlotState;
pub use memory::InMemoryAppointmentStore;
pub use slots::{slot_starts, SlotGenerator};
pub use store::AppointmentStore;
pub use supabase::SupabaseAppointmentStore;
