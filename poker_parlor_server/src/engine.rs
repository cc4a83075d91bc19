use crate::room::Room;
use poker_parlor_core::{
    build_player_view, ActionType, GameType, PlayerId, PlayerView, PokerError, PokerGames,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// 玩家动作请求
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action_type: ActionType,
    pub amount: u32,
}

/// 玩法引擎能力
///
/// 每种玩法一个实现，在房间创建时选定并登记，之后所有操作都走
/// 登记好的引用，不再按请求反复查表分发。
pub trait GameEngine: Send + Sync {
    fn game_type(&self) -> GameType;

    /// 初始化牌局系列；房间玩法不匹配或已初始化过则失败
    fn init_games(&self, room: &mut Room, small_blind: u32, init_token: u32)
        -> Result<(), PokerError>;

    /// 开始新的一局，随机源由调用方注入
    fn start_game(&self, room: &mut Room, rng: &mut dyn RngCore) -> Result<(), PokerError>;

    /// 处理一名玩家的动作
    fn handle_action(
        &self,
        room: &mut Room,
        player_id: PlayerId,
        request: &ActionRequest,
    ) -> Result<(), PokerError>;

    /// 构造某玩家视角的只读投影
    fn player_view(&self, room: &Room, player_id: PlayerId) -> PlayerView;
}

/// 德州扑克玩法
pub struct PokerEngine;

impl GameEngine for PokerEngine {
    fn game_type(&self) -> GameType {
        GameType::Poker
    }

    fn init_games(
        &self,
        room: &mut Room,
        small_blind: u32,
        init_token: u32,
    ) -> Result<(), PokerError> {
        if room.table_metadata.game_type != self.game_type() {
            return Err(PokerError::InvalidTransition(
                "房间玩法与引擎不匹配".into(),
            ));
        }
        if room.poker_games.is_some() {
            return Err(PokerError::InvalidTransition(
                "牌局系列已经初始化过".into(),
            ));
        }
        room.poker_games = Some(PokerGames::new(small_blind, init_token));
        Ok(())
    }

    fn start_game(&self, room: &mut Room, rng: &mut dyn RngCore) -> Result<(), PokerError> {
        let Room {
            table_metadata,
            poker_games,
            ..
        } = room;
        let games = poker_games
            .as_mut()
            .ok_or_else(|| PokerError::InvalidTransition("牌局系列尚未初始化".into()))?;
        games.start_game(table_metadata, rng)
    }

    fn handle_action(
        &self,
        room: &mut Room,
        player_id: PlayerId,
        request: &ActionRequest,
    ) -> Result<(), PokerError> {
        let games = room
            .poker_games
            .as_mut()
            .ok_or_else(|| PokerError::InvalidTransition("牌局系列尚未初始化".into()))?;
        games.handle_player_action(player_id, request.action_type, request.amount)
    }

    fn player_view(&self, room: &Room, player_id: PlayerId) -> PlayerView {
        build_player_view(&room.table_metadata, room.poker_games.as_ref(), player_id)
    }
}

/// 玩法到引擎实例的一次性解析
pub fn engine_for(game_type: GameType) -> &'static dyn GameEngine {
    match game_type {
        GameType::Poker => &PokerEngine,
    }
}

// --- 单元测试 ---
