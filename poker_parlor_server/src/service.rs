use crate::engine::{engine_for, ActionRequest, GameEngine};
use crate::lock::RoomLocks;
use crate::room::Room;
use crate::store::SnapshotStore;
use dashmap::DashMap;
use poker_parlor_core::{GameType, PlayerId, PlayerView, PokerError, RoomId};
use rand::RngCore;
use std::time::Duration;
use tracing::info;

/// 房间服务：所有状态变更的并发闸门
///
/// 每个变更操作的流程固定为：取房间锁 -> 读快照 -> 内存变更 -> 写回，
/// 锁守卫随作用域释放。同一房间的操作按取锁成功的顺序严格串行，
/// 后来者看到的一定是前一个操作写回的状态。校验失败时不写回，
/// 不会留下半成品快照。只读投影不取锁，允许读到轻微滞后的快照。
pub struct RoomService<S: SnapshotStore> {
    store: S,
    locks: RoomLocks,
    engines: DashMap<RoomId, &'static dyn GameEngine>,
}

impl<S: SnapshotStore> RoomService<S> {
    pub fn new(store: S, lock_timeout: Duration) -> RoomService<S> {
        RoomService {
            store,
            locks: RoomLocks::new(lock_timeout),
            engines: DashMap::new(),
        }
    }

    /// 创建房间并登记其玩法引擎
    pub fn create_room(&self, game_type: GameType, max_slots: u8) -> Result<Room, PokerError> {
        let room = Room::new(game_type, max_slots);
        self.engines.insert(room.room_id, engine_for(game_type));
        self.store.save(&room)?;
        info!("房间 {} 已创建", room.room_id);
        Ok(room)
    }

    /// 房间在创建时已登记引擎；从存储恢复的房间按快照里的玩法补登记一次
    fn engine_of(&self, room: &Room) -> &'static dyn GameEngine {
        *self
            .engines
            .entry(room.room_id)
            .or_insert_with(|| engine_for(room.table_metadata.game_type))
    }

    /// 在房间锁内执行一次 读快照 -> 变更 -> 写回
    fn mutate_room(
        &self,
        room_id: &RoomId,
        f: impl FnOnce(&mut Room, &'static dyn GameEngine) -> Result<(), PokerError>,
    ) -> Result<Room, PokerError> {
        self.locks.with_lock(room_id, || {
            let mut room = self
                .store
                .load(room_id)?
                .ok_or_else(|| PokerError::NotFound(format!("房间 {room_id} 不存在")))?;
            let engine = self.engine_of(&room);
            f(&mut room, engine)?;
            self.store.save(&room)?;
            Ok(room)
        })?
    }

    /// 初始化牌局系列
    pub fn init_games(
        &self,
        room_id: &RoomId,
        small_blind: u32,
        init_token: u32,
    ) -> Result<Room, PokerError> {
        let room = self.mutate_room(room_id, |room, engine| {
            engine.init_games(room, small_blind, init_token)
        })?;
        info!("房间 {room_id} 初始化牌局系列，小盲 {small_blind}，初始筹码 {init_token}");
        Ok(room)
    }

    /// 开始新的一局
    pub fn start_game(
        &self,
        room_id: &RoomId,
        rng: &mut dyn RngCore,
    ) -> Result<Room, PokerError> {
        let room = self.mutate_room(room_id, |room, engine| engine.start_game(room, rng))?;
        if let Some(game) = room.poker_games.as_ref().and_then(|g| g.current_game()) {
            info!("房间 {room_id} 开始第 {} 局", game.game_id);
        }
        Ok(room)
    }

    /// 处理一名玩家的动作
    pub fn handle_player_action(
        &self,
        room_id: &RoomId,
        player_id: PlayerId,
        request: &ActionRequest,
    ) -> Result<Room, PokerError> {
        let room = self.mutate_room(room_id, |room, engine| {
            engine.handle_action(room, player_id, request)
        })?;
        info!(
            "房间 {room_id} 玩家 {player_id} 执行 {:?}",
            request.action_type
        );
        Ok(room)
    }

    /// 把玩家写进一个空座位
    /// 入座资格的审批在外部流程完成，这里只负责把结果原子地写进快照
    pub fn seat_player(
        &self,
        room_id: &RoomId,
        slot_idx: usize,
        player_id: PlayerId,
    ) -> Result<Room, PokerError> {
        self.mutate_room(room_id, |room, _| room.seat_player(slot_idx, player_id))
    }

    /// 某玩家视角的只读投影，不取锁
    pub fn player_view(
        &self,
        room_id: &RoomId,
        player_id: PlayerId,
    ) -> Result<PlayerView, PokerError> {
        let room = self
            .store
            .load(room_id)?
            .ok_or_else(|| PokerError::NotFound(format!("房间 {room_id} 不存在")))?;
        Ok(self.engine_of(&room).player_view(&room, player_id))
    }
}

// --- 单元测试 ---
