//! # 德州扑克房间核心规则库
//!
//! 这个 `core` crate 包含一个多人牌桌房间的全部核心规则：
//! 牌与牌力模型、最优组合评估、单局下注状态机、终局分池，
//! 以及跨局共享筹码余额的牌局系列。
//! 它不关心网络传输、玩家鉴权和快照存储，这些由上层服务负责；
//! 座位占用作为输入传进来，更新后的牌局状态作为输出返回。

mod card;
mod error;
mod game;
mod hand;
mod pot;
mod series;
mod state;
mod view;

pub use card::*;

pub use error::*;

pub use hand::*;

pub use state::*;

pub use view::*;
