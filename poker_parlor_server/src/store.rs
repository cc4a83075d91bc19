use crate::room::Room;
use dashmap::DashMap;
use poker_parlor_core::{PokerError, RoomId};

/// 房间快照存储
///
/// 以 `room_id` 为键读写整个 [`Room`]。实际后端（键值库、关系库）是
/// 外部协作方的选择，核心流程只依赖这三个操作。
pub trait SnapshotStore: Send + Sync {
    fn load(&self, room_id: &RoomId) -> Result<Option<Room>, PokerError>;
    fn save(&self, room: &Room) -> Result<(), PokerError>;
    fn remove(&self, room_id: &RoomId);
}

/// 进程内实现：DashMap 里保存 JSON 编码的快照
///
/// 每次读写都经过完整的编解码，序列化模型不兼容会立刻暴露，
/// 而不是等到换了存储后端才发现。
#[derive(Default)]
pub struct MemoryStore {
    rooms: DashMap<RoomId, String>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, room_id: &RoomId) -> Result<Option<Room>, PokerError> {
        match self.rooms.get(room_id) {
            None => Ok(None),
            Some(encoded) => serde_json::from_str(encoded.value())
                .map(Some)
                .map_err(|e| PokerError::Corrupt(format!("房间 {room_id} 快照无法解码: {e}"))),
        }
    }

    fn save(&self, room: &Room) -> Result<(), PokerError> {
        let encoded = serde_json::to_string(room)
            .map_err(|e| PokerError::Corrupt(format!("房间 {} 快照无法编码: {e}", room.room_id)))?;
        self.rooms.insert(room.room_id, encoded);
        Ok(())
    }

    fn remove(&self, room_id: &RoomId) {
        self.rooms.remove(room_id);
    }
}

// --- 单元测试 ---
