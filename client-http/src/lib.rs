mod directory;
mod envelope;

pub use directory::HttpEmployeeDirectory;
pub use envelope::ApiResponse;
