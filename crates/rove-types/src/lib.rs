pub mod artifact;
pub mod cid;
pub mod fingerprint;
pub mod surface;

pub use artifact::{ActionDetails, Artifact, ItemId, ItemIdentity, LastAction, SubmissionRecord};
pub use cid::{Cid, CidError};
pub use fingerprint::Fingerprint;
pub use surface::{
    AuthOutcome, AutomationSurface, CollectedItem, ContentStore, Credentials, ItemRef,
    ObservedItem, RoundClock, SearchSpec, SurfaceError, TextGenerator,
};

/// Task epoch identifier, owned by the network and read-only to the node.
pub type RoundId = u64;
