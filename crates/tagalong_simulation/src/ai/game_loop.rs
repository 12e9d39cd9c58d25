//! Game loop: tick source + часы (time of day) + реестр подписок.
//!
//! Подписка = scoped resource: берётся в `setup`, отдаётся ровно один раз в
//! `dispose`. Системы доставляют тики только подписчикам канала.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::error::{CompanionError, Result};

/// Время начала дня (HHMM)
pub const DAY_START: u32 = 600;
/// После этого времени начинается новый день
pub const DAY_END: u32 = 2600;

/// Канал уведомлений game loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LoopChannel {
    /// Мир продвинулся на один тик
    UpdateTicked,
    /// Сменилось время суток (шаг 10 минут)
    TimeChanged,
}

/// Handle подписки (возвращается в `unsubscribe`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
    channel: LoopChannel,
}

impl Subscription {
    pub fn channel(&self) -> LoopChannel {
        self.channel
    }
}

/// Источник тиков: subscribe/unsubscribe на каналы
pub trait TickSource {
    fn subscribe(&mut self, channel: LoopChannel, subscriber: Entity) -> Result<Subscription>;

    fn unsubscribe(&mut self, subscription: Subscription) -> Result<()>;
}

/// Game loop resource: счётчик тиков, часы, подписчики
#[derive(Resource, Debug, Clone)]
pub struct GameLoop {
    tick: u64,
    time_of_day: u32,
    ticks_per_time_step: u64,
    next_id: u64,
    subscribers: BTreeMap<u64, (LoopChannel, Entity)>,
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new(420)
    }
}

impl GameLoop {
    pub fn new(ticks_per_time_step: u64) -> Self {
        Self {
            tick: 0,
            time_of_day: DAY_START,
            ticks_per_time_step: ticks_per_time_step.max(1),
            next_id: 0,
            subscribers: BTreeMap::new(),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn time_of_day(&self) -> u32 {
        self.time_of_day
    }

    pub fn set_time_of_day(&mut self, time: u32) {
        self.time_of_day = time;
    }

    /// Продвинуть мир на один тик. Возвращает `(old, new)` если сменилось время.
    pub fn advance(&mut self) -> Option<(u32, u32)> {
        self.tick += 1;

        if self.tick % self.ticks_per_time_step != 0 {
            return None;
        }

        let old = self.time_of_day;
        self.time_of_day = next_time_of_day(old);
        Some((old, self.time_of_day))
    }

    /// Подписчики канала в порядке подписки (детерминированно)
    pub fn subscribers(&self, channel: LoopChannel) -> Vec<Entity> {
        self.subscribers
            .values()
            .filter(|(ch, _)| *ch == channel)
            .map(|(_, entity)| *entity)
            .collect()
    }

    pub fn is_subscribed(&self, subscriber: Entity, channel: LoopChannel) -> bool {
        self.subscribers
            .values()
            .any(|(ch, entity)| *ch == channel && *entity == subscriber)
    }

    /// Снять все подписки subscriber'а (его state machine уже не существует)
    pub fn release_subscriber(&mut self, subscriber: Entity) -> usize {
        let before = self.subscribers.len();
        self.subscribers.retain(|_, (_, entity)| *entity != subscriber);
        before - self.subscribers.len()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl TickSource for GameLoop {
    fn subscribe(&mut self, channel: LoopChannel, subscriber: Entity) -> Result<Subscription> {
        if self.is_subscribed(subscriber, channel) {
            return Err(CompanionError::Subscription(format!(
                "{subscriber:?} already subscribed to {channel:?}"
            )));
        }

        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.insert(id, (channel, subscriber));

        Ok(Subscription { id, channel })
    }

    fn unsubscribe(&mut self, subscription: Subscription) -> Result<()> {
        match self.subscribers.remove(&subscription.id) {
            Some(_) => Ok(()),
            None => Err(CompanionError::Subscription(format!(
                "unknown subscription #{} on {:?}",
                subscription.id, subscription.channel
            ))),
        }
    }
}

/// HHMM + 10 минут; после DAY_END: новый день с DAY_START
pub fn next_time_of_day(time: u32) -> u32 {
    let (hours, minutes) = (time / 100, time % 100 + 10);
    let next = if minutes >= 60 {
        (hours + 1) * 100
    } else {
        hours * 100 + minutes
    };

    if next > DAY_END {
        DAY_START
    } else {
        next
    }
}
