// Archive services queried directly, without fallback

pub mod archive_today;
pub mod ghostarchive;
pub mod memento;
pub mod wayback;

pub use archive_today::ArchiveToday;
pub use ghostarchive::Ghostarchive;
pub use memento::TimeTravel;
pub use wayback::Wayback;
