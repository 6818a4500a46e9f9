pub mod enums;
pub mod meal;
pub mod mood;
pub mod profile;
pub mod symptom;
pub mod user;

pub use enums::*;
pub use meal::*;
pub use mood::*;
pub use profile::*;
pub use symptom::*;
pub use user::*;
