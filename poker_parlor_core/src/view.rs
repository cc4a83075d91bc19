use crate::card::Card;
use crate::state::*;
use serde::{Deserialize, Serialize};

// --- 面向玩家的投影 ---
// 服务端持有完整状态；发给玩家的快照必须先经过这里净化，
// 一局没到摊牌，任何人都看不到别人的底牌。

/// 玩家自己的局内状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnState {
    pub cards: [Card; 2],
    pub amount_available: u32,
    pub amount_betting: u32,
    pub total_betting: u32,
    pub player_status: PlayerStatus,
    pub pot_won: u32,
}

/// 对手的公开信息
/// 底牌默认隐藏，只有摊牌或终局后、且对方没有弃牌时才展示。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentView {
    pub player_id: PlayerId,
    pub slot_idx: u8,
    pub amount_available: u32,
    pub amount_betting: u32,
    pub total_betting: u32,
    pub player_status: PlayerStatus,
    pub pot_won: u32,
    pub cards: Option<[Card; 2]>,
}

/// 当前一局的投影
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameView {
    pub game_id: u32,
    pub stage: GameStage,
    pub game_status: GameStatus,
    /// 仅包含当前阶段已翻开的公共牌
    pub table_cards: Vec<Card>,
    pub next_player_id: Option<PlayerId>,
    pub is_your_turn: bool,
    /// 轮到自己、且仍可行动时的最低跟注额
    pub min_bet: Option<u32>,
    pub own: Option<OwnState>,
    pub opponents: Vec<OpponentView>,
    pub pots: Vec<Pot>,
}

/// 面向单个玩家的房间投影
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub player_id: PlayerId,
    /// 可入座的座位号，取自实时座位表而不是局内冻结副本
    pub available_slots: Vec<u8>,
    pub token_balance: Option<u32>,
    pub game: Option<GameView>,
}

/// 构造某玩家视角的房间投影
///
/// 观战者和未入局的玩家也能拿到投影：看得到座位和公开进度，
/// 但 `own` 为空。
pub fn build_player_view(
    table: &TableMetadata,
    series: Option<&PokerGames>,
    player_id: PlayerId,
) -> PlayerView {
    let available_slots = table
        .slots
        .iter()
        .enumerate()
        .filter(|(_, s)| s.slot_status == SlotStatus::Empty)
        .map(|(idx, _)| idx as u8)
        .collect();

    let token_balance = series
        .and_then(|s| s.players.get(&player_id))
        .map(|t| t.amount_available);

    let game = series
        .and_then(|s| s.current_game())
        .map(|g| build_game_view(g, player_id));

    PlayerView {
        player_id,
        available_slots,
        token_balance,
        game,
    }
}

fn build_game_view(game: &Game, player_id: PlayerId) -> GameView {
    let revealed = game.stage.revealed_cards();
    let reveal_showdown =
        game.stage == GameStage::ShowHand || game.game_status == GameStatus::Over;

    let own = game.player_states.get(&player_id).map(|s| OwnState {
        cards: s.cards,
        amount_available: s.amount_available,
        amount_betting: s.amount_betting,
        total_betting: s.total_betting,
        player_status: s.player_status,
        pot_won: s.pot_won,
    });

    let is_your_turn = game.next_player_id == Some(player_id);
    let min_bet = match &own {
        Some(s)
            if game.game_status == GameStatus::Playing
                && s.player_status == PlayerStatus::Betting =>
        {
            game.player_min_bet(&player_id)
        }
        _ => None,
    };

    // 对手列表按冻结座位表的顺序
    let opponents = game
        .table_metadata
        .slots
        .iter()
        .enumerate()
        .filter_map(|(slot_idx, slot)| {
            let opponent_id = slot.player_id?;
            if opponent_id == player_id {
                return None;
            }
            let state = game.player_states.get(&opponent_id)?;
            let cards = (reveal_showdown && state.player_status == PlayerStatus::Betting)
                .then_some(state.cards);
            Some(OpponentView {
                player_id: opponent_id,
                slot_idx: slot_idx as u8,
                amount_available: state.amount_available,
                amount_betting: state.amount_betting,
                total_betting: state.total_betting,
                player_status: state.player_status,
                pot_won: state.pot_won,
                cards,
            })
        })
        .collect();

    GameView {
        game_id: game.game_id,
        stage: game.stage,
        game_status: game.game_status,
        table_cards: game.table_cards[..revealed].to_vec(),
        next_player_id: game.next_player_id,
        is_your_turn,
        min_bet,
        own,
        opponents,
        pots: game.pots.clone(),
    }
}

// --- 单元测试 ---
