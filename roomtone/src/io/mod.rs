//! Scene documents and their instantiation

pub mod scene;

pub use scene::{
    DoorRecord, ListenerRecord, OccluderRecord, PortalRecord, RoomRecord, SceneDoc, SceneError,
    SceneHandles, SourceRecord,
};
