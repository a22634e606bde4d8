pub mod attachment;
pub mod case;
pub mod error;

pub use attachment::{Attachment, AttachmentBlob, CreateAttachment};
pub use case::{Case, CaseMetaView, CaseView};
pub use error::CaselineError;
