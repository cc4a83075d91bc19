use dashmap::DashMap;
use parking_lot::Mutex;
use poker_parlor_core::{PokerError, RoomId};
use std::sync::Arc;
use std::time::Duration;

/// 每个房间一把独占锁
///
/// 所有改动房间状态的操作必须先拿到对应房间的锁，整个
/// 读快照 -> 内存变更 -> 写回 的序列在锁内完成，同一房间的操作因此
/// 严格串行。不同房间互不影响；调用方从不同时持有两把房间锁，
/// 所以不存在死锁的可能。获取锁带超时，超时以 `ResourceBusy` 返回，
/// 由调用方决定是否重试。
pub struct RoomLocks {
    locks: DashMap<RoomId, Arc<Mutex<()>>>,
    timeout: Duration,
}

impl RoomLocks {
    pub fn new(timeout: Duration) -> RoomLocks {
        RoomLocks {
            locks: DashMap::new(),
            timeout,
        }
    }

    /// 在某房间的独占锁内执行 `f`
    ///
    /// 锁在 `f` 返回后随守卫一起释放，出错路径也不例外。
    /// 超时拿不到锁时返回 `ResourceBusy`，此时 `f` 不会被执行。
    pub fn with_lock<T>(
        &self,
        room_id: &RoomId,
        f: impl FnOnce() -> T,
    ) -> Result<T, PokerError> {
        // 先克隆 Arc 再释放 DashMap 的分片引用，锁表本身不能成为竞争点
        let mutex = Arc::clone(&self.locks.entry(*room_id).or_default());
        let _guard = mutex.try_lock_for(self.timeout).ok_or_else(|| {
            PokerError::ResourceBusy(format!("房间 {room_id} 正被其他操作占用"))
        })?;
        Ok(f())
    }
}

// --- 单元测试 ---
