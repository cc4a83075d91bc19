use crate::card::Card;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub type RoomId = Uuid;
pub type PlayerId = Uuid;

// --- 桌面结构 ---

/// 房间支持的玩法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Poker,
}

/// 座位状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Active,   // 入座参与牌局
    Spectate, // 入座观战
    Empty,
}

/// 单个座位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub player_id: Option<PlayerId>,
    pub slot_status: SlotStatus,
}

impl Slot {
    pub fn empty() -> Slot {
        Slot { player_id: None, slot_status: SlotStatus::Empty }
    }

    pub fn active(player_id: PlayerId) -> Slot {
        Slot { player_id: Some(player_id), slot_status: SlotStatus::Active }
    }

    pub fn spectate(player_id: PlayerId) -> Slot {
        Slot { player_id: Some(player_id), slot_status: SlotStatus::Spectate }
    }
}

/// 桌面元数据
/// 座位占用由外部的入座流程写入；开局时整张表会被冻结进 [`Game`]，
/// 之后的座位变动不会影响进行中的一局。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub game_type: GameType,
    pub max_slots: u8,
    pub slots: Vec<Slot>,
}

impl TableMetadata {
    pub fn new(game_type: GameType, max_slots: u8) -> TableMetadata {
        TableMetadata {
            game_type,
            max_slots,
            slots: vec![Slot::empty(); max_slots as usize],
        }
    }

    /// 所有 ACTIVE 座位上的玩家，按座位顺序
    pub fn active_players(&self) -> Vec<PlayerId> {
        self.slots
            .iter()
            .filter(|s| s.slot_status == SlotStatus::Active)
            .filter_map(|s| s.player_id)
            .collect()
    }

    /// 所有有人的座位上的玩家（含观战），按座位顺序
    pub fn seated_players(&self) -> Vec<PlayerId> {
        self.slots.iter().filter_map(|s| s.player_id).collect()
    }
}

// --- 牌局配置 ---

/// 平分奖池出现余数时的处理策略
/// 历史实现直接截断，余下的筹码凭空消失；默认改为按座位顺序逐个补发。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    #[default]
    SeatOrder, // 从庄家下家数起，赢家按座位顺序每人多拿 1
    Discard,   // 截断，余数弃掉
}

/// 一局系列共享的配置与庄家位置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMetadata {
    pub small_blind: u32,
    pub init_token: u32,
    pub button_idx: usize,
    #[serde(default)]
    pub remainder_policy: RemainderPolicy,
}

// --- 单局内的玩家状态 ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Betting,
    Folded,
}

/// 玩家在一局中的状态，只在本局内被状态机修改
/// `amount_available` 在局内只减不增，`total_betting` 只增不减。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerGameState {
    pub player_id: PlayerId,
    pub cards: [Card; 2],
    pub amount_available: u32,
    pub amount_betting: u32, // 本阶段已下注
    pub total_betting: u32,  // 本局累计下注
    pub player_status: PlayerStatus,
    pub pot_won: u32,
}

impl PlayerGameState {
    pub fn new(player_id: PlayerId, cards: [Card; 2], amount_available: u32) -> PlayerGameState {
        PlayerGameState {
            player_id,
            cards,
            amount_available,
            amount_betting: 0,
            total_betting: 0,
            player_status: PlayerStatus::Betting,
            pot_won: 0,
        }
    }

    /// 投入筹码
    ///
    /// # Panics
    /// 要求 `0 < amount <= amount_available`，违反时 panic；
    /// 合法性校验应在调用前完成。
    pub fn bet(&mut self, amount: u32) {
        assert!(amount > 0, "下注额必须大于0");
        assert!(amount <= self.amount_available, "下注额不能超过剩余筹码");
        self.amount_available -= amount;
        self.amount_betting += amount;
        self.total_betting += amount;
    }

    pub fn fold(&mut self) {
        self.player_status = PlayerStatus::Folded;
    }
}

// --- 动作与奖池 ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Check,
    Bet,
    Fold,
}

/// 动作日志，只追加不修改
/// 盲注直接修改状态，不产生日志；阶段完成的判定依赖这份日志。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub player_id: PlayerId,
    pub stage: GameStage,
    pub action_type: ActionType,
    pub amount_bet: u32,
}

/// 一份奖池及其赢家，只在一局结束时产生
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pot {
    pub amount: u32,
    pub winner_ids: Vec<PlayerId>,
}

// --- 阶段与局状态 ---

/// 牌局阶段，只会沿固定顺序向前推进
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStage {
    PreFlop,
    Flop,
    Turn,
    River,
    ShowHand,
}

impl GameStage {
    /// 下一个阶段；SHOW_HAND 已是终点
    pub fn next(self) -> GameStage {
        match self {
            GameStage::PreFlop => GameStage::Flop,
            GameStage::Flop => GameStage::Turn,
            GameStage::Turn => GameStage::River,
            GameStage::River | GameStage::ShowHand => GameStage::ShowHand,
        }
    }

    /// 当前阶段向玩家展示的公共牌数量
    /// 5 张公共牌开局即抽定，阶段只控制展示进度
    pub fn revealed_cards(self) -> usize {
        match self {
            GameStage::PreFlop => 0,
            GameStage::Flop => 3,
            GameStage::Turn => 4,
            GameStage::River | GameStage::ShowHand => 5,
        }
    }
}

/// 局状态
/// PAUSED 是保留值，目前没有任何流转会进入，暂停功能尚未定义。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Playing,
    Over,
    Paused,
}

/// 一局牌 (Game)
///
/// `table_metadata` 与 `metadata` 是开局时的冻结副本，
/// 本局内所有座位扫描、盲注和庄家位置都以副本为准。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub game_id: u32,
    pub table_metadata: TableMetadata,
    pub metadata: GameMetadata,
    pub table_cards: [Card; 5],
    pub player_states: HashMap<PlayerId, PlayerGameState>,
    pub next_player_id: Option<PlayerId>,
    pub actions: Vec<Action>,
    pub pots: Vec<Pot>,
    pub stage: GameStage,
    pub game_status: GameStatus,
}

// --- 跨局的持久筹码 ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountChangeType {
    Increase,
    Decrease,
    NotChanged,
}

/// 一局结束后的余额变更记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountChangeLog {
    pub change_type: AmountChangeType,
    pub amount_changed: i64, // 带符号：赢得奖池 - 累计下注
    pub game_id: u32,
}

/// 玩家的持久筹码余额，跨局存在，归牌局系列所有
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerTokens {
    pub player_id: PlayerId,
    pub amount_available: u32,
    pub amount_change_log: Vec<AmountChangeLog>,
}

impl PlayerTokens {
    pub fn new(player_id: PlayerId, amount_available: u32) -> PlayerTokens {
        PlayerTokens {
            player_id,
            amount_available,
            amount_change_log: Vec::new(),
        }
    }

    /// 将一局的输赢折入持久余额，并追加变更记录
    /// `total_betting` 不会超过开局余额，所以余额不会变负。
    pub fn apply_change(&mut self, delta: i64, game_id: u32) {
        let change_type = match delta {
            d if d > 0 => AmountChangeType::Increase,
            d if d < 0 => AmountChangeType::Decrease,
            _ => AmountChangeType::NotChanged,
        };
        self.amount_available = (self.amount_available as i64 + delta) as u32;
        self.amount_change_log.push(AmountChangeLog {
            change_type,
            amount_changed: delta,
            game_id,
        });
    }
}

/// 牌局系列 (PokerGames)
/// `games` 只追加，最后一项是当前局；`players` 的余额跨局存续。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokerGames {
    pub metadata: GameMetadata,
    pub games: Vec<Game>,
    pub players: HashMap<PlayerId, PlayerTokens>,
}

// --- 单元测试 ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, CardColor};

    fn cards() -> [Card; 2] {
        [
            Card::from_parts(CardColor::Spade, 1),
            Card::from_parts(CardColor::Heart, 13),
        ]
    }

    #[test]
    fn test_bet_moves_amounts() {
        let mut state = PlayerGameState::new(PlayerId::new_v4(), cards(), 100);
        state.bet(30);
        assert_eq!(state.amount_available, 70);
        assert_eq!(state.amount_betting, 30);
        assert_eq!(state.total_betting, 30);

        state.bet(70);
        assert_eq!(state.amount_available, 0);
        assert_eq!(state.total_betting, 100);
    }

    #[test]
    #[should_panic]
    fn test_bet_over_available() {
        let mut state = PlayerGameState::new(PlayerId::new_v4(), cards(), 10);
        state.bet(11);
    }

    #[test]
    #[should_panic]
    fn test_bet_zero() {
        let mut state = PlayerGameState::new(PlayerId::new_v4(), cards(), 10);
        state.bet(0);
    }

    #[test]
    fn test_stage_sequence() {
        assert_eq!(GameStage::PreFlop.next(), GameStage::Flop);
        assert_eq!(GameStage::Flop.next(), GameStage::Turn);
        assert_eq!(GameStage::Turn.next(), GameStage::River);
        assert_eq!(GameStage::River.next(), GameStage::ShowHand);
        assert_eq!(GameStage::ShowHand.next(), GameStage::ShowHand);
    }

    #[test]
    fn test_revealed_cards_by_stage() {
        assert_eq!(GameStage::PreFlop.revealed_cards(), 0);
        assert_eq!(GameStage::Flop.revealed_cards(), 3);
        assert_eq!(GameStage::Turn.revealed_cards(), 4);
        assert_eq!(GameStage::River.revealed_cards(), 5);
        assert_eq!(GameStage::ShowHand.revealed_cards(), 5);
    }

    #[test]
    fn test_apply_change_log() {
        let mut tokens = PlayerTokens::new(PlayerId::new_v4(), 1000);
        tokens.apply_change(150, 0);
        tokens.apply_change(-200, 1);
        tokens.apply_change(0, 2);

        assert_eq!(tokens.amount_available, 950);
        assert_eq!(tokens.amount_change_log.len(), 3);
        assert_eq!(tokens.amount_change_log[0].change_type, AmountChangeType::Increase);
        assert_eq!(tokens.amount_change_log[1].change_type, AmountChangeType::Decrease);
        assert_eq!(tokens.amount_change_log[1].amount_changed, -200);
        assert_eq!(tokens.amount_change_log[2].change_type, AmountChangeType::NotChanged);
    }
}
