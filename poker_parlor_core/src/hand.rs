use crate::card::Card;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

// --- 牌力数据结构 ---

/// 牌型等级 (HandType)
/// 变体从小到大排列，派生的 `Ord` 直接给出牌型之间的强弱关系。
/// 同牌型之间的比较见 [`Hand`]。
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandType {
    HighCard,     // 高牌
    Pair,         // 一对
    TwoPairs,     // 两对
    ThreeOfAKind, // 三条
    Straight,     // 顺子
    Flush,        // 同花
    FullHouse,    // 葫芦
    FourOfAKind,  // 四条
    StraightFlush, // 同花顺
}

/// 点数束 (CardBundle)：同一点数的所有牌
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct CardBundle {
    pub number: u8,
    pub cards: Vec<Card>,
}

/// 手牌结构 (HandStyle)：5 张牌按点数分束后的排列
///
/// 束按 (束大小, 点数牌力) 从大到小排序，Ace 的牌力视为最大。
/// 顺子是例外：束按顺子序列从大到小排列，轮子顺 (A-2-3-4-5) 的
/// Ace 作为最小牌放到末尾，即 5,4,3,2,A。
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct HandStyle {
    pub bundles: Vec<CardBundle>,
}

/// 最终牌力 (Hand)：牌型等级加上用于比较的手牌结构
///
/// 全序关系：先比牌型等级，再按束顺序逐个比较点数牌力。
/// 比较不关心花色，牌型与点数序列都相同的两手牌相等。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hand {
    pub hand_type: HandType,
    pub style: HandStyle,
}

/// 点数换算成比较用的牌力：Ace (1) 视为最大
fn played_rank(number: u8) -> u8 {
    if number == 1 { 14 } else { number }
}

// --- 五张牌的判定 ---

/// 五张牌是否为同花
fn is_flush(cards: &[Card]) -> bool {
    cards.iter().all(|c| c.color == cards[0].color)
}

/// 五张牌是否为顺子
/// Ace 可以作最小 (A-2-3-4-5) 也可以作最大 (10-J-Q-K-A)
fn is_straight(cards: &[Card]) -> bool {
    let mut numbers: Vec<u8> = cards.iter().map(|c| c.number).collect();
    numbers.sort_unstable();
    if numbers == [1, 10, 11, 12, 13] {
        return true;
    }
    numbers.windows(2).all(|w| w[1] == w[0] + 1)
}

impl HandStyle {
    /// 将 5 张牌按点数分束并排序
    fn from_cards(cards: &[Card]) -> HandStyle {
        let mut bundles: Vec<CardBundle> = Vec::new();
        for card in cards {
            match bundles.iter_mut().find(|b| b.number == card.number) {
                Some(bundle) => bundle.cards.push(*card),
                None => bundles.push(CardBundle {
                    number: card.number,
                    cards: vec![*card],
                }),
            }
        }
        bundles.sort_by(|a, b| {
            (b.cards.len(), played_rank(b.number)).cmp(&(a.cards.len(), played_rank(a.number)))
        });
        HandStyle { bundles }
    }

    /// 各束的大小，从大到小，例如葫芦是 [3, 2]
    pub fn counts(&self) -> Vec<usize> {
        self.bundles.iter().map(|b| b.cards.len()).collect()
    }
}

impl Hand {
    /// 评估一手 5 张牌的牌力
    ///
    /// 判定顺序从强到弱：同花顺、四条、葫芦、同花、顺子、三条、两对、一对、高牌，
    /// 首个命中的即为结果。
    ///
    /// # Panics
    /// 牌数不是 5 张时 panic。
    pub fn from_cards(cards: &[Card]) -> Hand {
        assert_eq!(cards.len(), 5, "评估的牌必须是5张");

        let mut style = HandStyle::from_cards(cards);
        let flush = is_flush(cards);
        let straight = is_straight(cards);

        let hand_type = if straight && flush {
            HandType::StraightFlush
        } else if style.counts() == [4, 1] {
            HandType::FourOfAKind
        } else if style.counts() == [3, 2] {
            HandType::FullHouse
        } else if flush {
            HandType::Flush
        } else if straight {
            HandType::Straight
        } else if style.counts() == [3, 1, 1] {
            HandType::ThreeOfAKind
        } else if style.counts() == [2, 2, 1] {
            HandType::TwoPairs
        } else if style.counts() == [2, 1, 1, 1] {
            HandType::Pair
        } else {
            HandType::HighCard
        };

        // 轮子顺里 Ace 是最小牌，挪到序列末尾
        if straight && style.bundles[0].number == 1 && style.bundles[1].number == 5 {
            style.bundles.rotate_left(1);
        }

        Hand { hand_type, style }
    }

    /// 用于同牌型比较的点数序列
    ///
    /// 非顺子按束顺序取各束点数的牌力；顺子取序列中第二小的点数作为唯一关键值，
    /// 轮子顺归一为 2，Ace 高顺子的 Ace 按 14 计（关键值 11），
    /// 这样 A-2-3-4-5 < 2-3-4-5-6 < ... < 10-J-Q-K-A。
    pub fn ranking_numbers(&self) -> Vec<u8> {
        match self.hand_type {
            HandType::Straight | HandType::StraightFlush => vec![self.straight_key()],
            _ => self
                .style
                .bundles
                .iter()
                .map(|b| played_rank(b.number))
                .collect(),
        }
    }

    fn straight_key(&self) -> u8 {
        let mut numbers: Vec<u8> = self.style.bundles.iter().map(|b| b.number).collect();
        numbers.sort_unstable();
        if numbers == [1, 10, 11, 12, 13] {
            11
        } else {
            numbers[1]
        }
    }
}

impl PartialEq for Hand {
    fn eq(&self, other: &Self) -> bool {
        self.hand_type == other.hand_type && self.ranking_numbers() == other.ranking_numbers()
    }
}

impl Eq for Hand {}

impl PartialOrd for Hand {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Hand {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.hand_type, self.ranking_numbers()).cmp(&(other.hand_type, other.ranking_numbers()))
    }
}

impl fmt::Display for HandType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            HandType::HighCard => "高牌",
            HandType::Pair => "一对",
            HandType::TwoPairs => "两对",
            HandType::ThreeOfAKind => "三条",
            HandType::Straight => "顺子",
            HandType::Flush => "同花",
            HandType::FullHouse => "葫芦",
            HandType::FourOfAKind => "四条",
            HandType::StraightFlush => "同花顺",
        })
    }
}

// --- 最优组合搜索 ---

/// 从底牌和公共牌中找出最优的 5 张牌组合牌力
///
/// 通过枚举所有 5 张组合来保证正确性（7 张牌共 21 种组合）。
/// 贪心做法（比如去掉最小的两张）会破坏顺子或同花，这里不采用。
/// 相同输入的评估结果是确定的。
///
/// # Panics
/// 公共牌多于 5 张、或总牌数不足 5 张时 panic。
pub fn find_best_hand(hole: &[Card; 2], community: &[Card]) -> Hand {
    assert!(community.len() <= 5, "公共牌最多5张");
    let mut all_cards: Vec<Card> = community.to_vec();
    all_cards.extend_from_slice(hole);
    assert!(all_cards.len() >= 5, "牌数不足5张无法评估");

    get_combinations(&all_cards, 5)
        .into_iter()
        .map(|combo| Hand::from_cards(&combo))
        .max()
        .unwrap() // 至少有一个组合
}

/// 辅助函数：从一个切片中生成所有大小为 k 的组合
fn get_combinations<T: Clone>(data: &[T], k: usize) -> Vec<Vec<T>> {
    if k == 0 {
        return vec![vec![]];
    }
    if data.len() < k {
        return vec![];
    }

    let mut result = vec![];
    let (first, rest) = data.split_at(1);

    // 包含第一个元素的组合
    let mut combinations_with_first = get_combinations(rest, k - 1);
    for combo in &mut combinations_with_first {
        combo.insert(0, first[0].clone());
    }
    result.append(&mut combinations_with_first);

    // 不包含第一个元素的组合
    if data.len() > k {
        let mut combinations_without_first = get_combinations(rest, k);
        result.append(&mut combinations_without_first);
    }

    result
}

// --- 单元测试 ---
