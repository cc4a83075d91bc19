use rand::prelude::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

// --- 扑克牌基础结构 ---

/// 花色 (CardColor)
/// 数组顺序决定了 card_id 的映射关系，调整顺序会破坏所有已存快照
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardColor {
    Spade,   // 黑桃 ♠️
    Heart,   // 红心 ♥️
    Diamond, // 方块 ♦️
    Club,    // 梅花 ♣️
}

impl CardColor {
    pub const ALL: [CardColor; 4] = [
        CardColor::Spade,
        CardColor::Heart,
        CardColor::Diamond,
        CardColor::Club,
    ];
}

/// 单张扑克牌 (Card)
///
/// `card_id` 取值 0..=51，与 `(color, number)` 一一对应：
/// `card_id = 花色序号 * 13 + number - 1`，其中 number 为 1..=13，1 表示 Ace。
/// 牌是不可变的值对象，三个字段始终保持这条双射关系。
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Card {
    pub card_id: u8,
    pub color: CardColor,
    pub number: u8,
}

impl Card {
    /// 由 0..=51 的编号还原一张牌
    ///
    /// # Panics
    /// 编号超出范围时 panic。
    pub fn from_id(card_id: u8) -> Card {
        assert!(card_id < 52, "card_id 必须在 0..=51 之间");
        Card {
            card_id,
            color: CardColor::ALL[(card_id / 13) as usize],
            number: card_id % 13 + 1,
        }
    }

    /// 由花色和点数构造一张牌
    ///
    /// # Panics
    /// 点数不在 1..=13 之间时 panic。
    pub fn from_parts(color: CardColor, number: u8) -> Card {
        assert!((1..=13).contains(&number), "number 必须在 1..=13 之间");
        let color_idx = CardColor::ALL.iter().position(|c| *c == color).unwrap() as u8;
        Card {
            card_id: color_idx * 13 + number - 1,
            color,
            number,
        }
    }
}

// --- 展示辅助 ---

impl fmt::Display for CardColor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            CardColor::Spade => "♠️",
            CardColor::Heart => "♥️",
            CardColor::Diamond => "♦️",
            CardColor::Club => "♣️",
        })
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let number = match self.number {
            1 => "A".to_string(),
            10 => "T".to_string(),
            11 => "J".to_string(),
            12 => "Q".to_string(),
            13 => "K".to_string(),
            n => n.to_string(),
        };
        write!(f, "{}{}", self.color, number)
    }
}

// --- 发牌 ---

/// 创建一副完整的 52 张扑克牌
pub fn full_deck() -> Vec<Card> {
    (0..52).map(Card::from_id).collect()
}

/// 从一副新牌中抽取 `count` 张互不重复的牌
///
/// 整副牌洗乱后取前 `count` 张，重复在构造上就不可能出现。
/// 随机源由调用方注入，测试中用带种子的 `StdRng` 即可复现发牌结果。
///
/// # Panics
/// `count` 超过 52 时 panic。
pub fn deal_cards<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Card> {
    assert!(count <= 52, "一副牌只有 52 张");
    let mut deck = full_deck();
    deck.shuffle(rng);
    deck.truncate(count);
    deck
}

// --- 单元测试 ---

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_card_id_round_trip() {
        // 52 个编号全部满足 id <-> (花色, 点数) 的双射
        for card_id in 0..52 {
            let card = Card::from_id(card_id);
            assert_eq!(card.card_id, card_id);
            assert_eq!(Card::from_parts(card.color, card.number), card);
        }
    }

    #[test]
    fn test_card_mapping() {
        let card = Card::from_id(0);
        assert_eq!(card.color, CardColor::Spade);
        assert_eq!(card.number, 1); // Ace

        let card = Card::from_id(13);
        assert_eq!(card.color, CardColor::Heart);
        assert_eq!(card.number, 1);

        let card = Card::from_id(51);
        assert_eq!(card.color, CardColor::Club);
        assert_eq!(card.number, 13); // King
    }

    #[test]
    #[should_panic]
    fn test_card_id_out_of_range() {
        Card::from_id(52);
    }

    #[test]
    fn test_deal_cards_unique() {
        let mut rng = StdRng::seed_from_u64(7);
        let cards = deal_cards(21, &mut rng);
        assert_eq!(cards.len(), 21);
        let ids: HashSet<u8> = cards.iter().map(|c| c.card_id).collect();
        assert_eq!(ids.len(), 21, "同一次发牌不允许出现重复的牌");
    }

    #[test]
    fn test_deal_cards_deterministic_with_seed() {
        // 相同种子发出相同的牌，测试可以依赖这一点构造确定局面
        let first = deal_cards(9, &mut StdRng::seed_from_u64(42));
        let second = deal_cards(9, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn test_display() {
        assert_eq!(Card::from_parts(CardColor::Spade, 1).to_string(), "♠️A");
        assert_eq!(Card::from_parts(CardColor::Heart, 10).to_string(), "♥️T");
        assert_eq!(Card::from_parts(CardColor::Club, 7).to_string(), "♣️7");
    }
}
