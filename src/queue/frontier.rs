// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use dashmap::DashSet;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Notify;

use crate::domain::models::page::FrontierEntry;
use crate::utils::url_utils;

/// 出队结果
#[derive(Debug)]
pub enum TakeOutcome {
    /// 取到一个待抓取条目
    Entry(FrontierEntry),
    /// 前沿已永久排空（队列为空且无进行中抓取，或已关闭）
    Drained,
}

/// 前沿内部状态
struct FrontierState {
    /// FIFO队列，条目按非递减深度入队，保证广度优先顺序
    queue: VecDeque<FrontierEntry>,
    /// 进行中的抓取数
    in_flight: usize,
    /// 是否已关闭（取消路径）
    closed: bool,
}

/// 爬取前沿
///
/// 去重的FIFO工作队列。`offer`对访问集做原子的检查并插入，
/// 因此同一URL无论被并发发现多少次都最多入队一次。
pub struct Frontier {
    state: Mutex<FrontierState>,
    /// 已入队或已抓取的规范化URL集合
    visited: DashSet<String>,
    notify: Notify,
    /// 深度上限，超过的条目被拒绝
    max_depth: u32,
    /// 页面数上限，访问集达到后拒绝新条目
    max_pages: usize,
}

impl Frontier {
    /// 创建新的前沿实例
    pub fn new(max_depth: u32, max_pages: usize) -> Self {
        Self {
            state: Mutex::new(FrontierState {
                queue: VecDeque::new(),
                in_flight: 0,
                closed: false,
            }),
            visited: DashSet::new(),
            notify: Notify::new(),
            max_depth,
            max_pages,
        }
    }

    /// 提议一个条目入队
    ///
    /// URL未被访问过且深度不超上限时入队，并在入队的同时将URL标记为已访问。
    ///
    /// # 返回值
    ///
    /// 条目被接受入队时返回true
    pub fn offer(&self, entry: FrontierEntry) -> bool {
        if entry.depth > self.max_depth {
            return false;
        }
        let key = url_utils::normalize_url(entry.url.clone()).to_string();

        // Ceiling check, dedup insert and enqueue happen under one lock so
        // concurrent offers can never overshoot max_pages
        {
            let mut state = self.state.lock();
            if state.closed {
                return false;
            }
            if self.visited.len() >= self.max_pages {
                return false;
            }
            if !self.visited.insert(key) {
                return false;
            }
            state.queue.push_back(entry);
        }
        self.notify.notify_waiters();
        true
    }

    /// 取出下一个条目
    ///
    /// 阻塞直到有条目可用；队列为空且无进行中抓取（或前沿已关闭）时
    /// 返回`Drained`，表示不会再有新工作。
    pub async fn take(&self) -> TakeOutcome {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking state so a wakeup between the check
            // and the await is not lost
            notified.as_mut().enable();
            {
                let mut state = self.state.lock();
                if let Some(entry) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return TakeOutcome::Entry(entry);
                }
                if state.closed || state.in_flight == 0 {
                    return TakeOutcome::Drained;
                }
            }
            notified.await;
        }
    }

    /// 标记一次抓取完成
    ///
    /// 每次成功的`take`之后必须恰好调用一次。
    pub fn complete(&self) {
        let drained = {
            let mut state = self.state.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            state.queue.is_empty() && state.in_flight == 0
        };
        if drained {
            self.notify.notify_waiters();
        }
    }

    /// 关闭前沿
    ///
    /// 丢弃待处理条目并拒绝后续提议；等待中的工作器收到`Drained`。
    pub fn close(&self) {
        {
            let mut state = self.state.lock();
            state.closed = true;
            state.queue.clear();
        }
        self.notify.notify_waiters();
    }

    /// 已访问（入队过）的URL数量
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use url::Url;

    fn entry(url: &str, depth: u32) -> FrontierEntry {
        let url = Url::parse(url).unwrap();
        if depth == 0 {
            FrontierEntry::root(url)
        } else {
            let parent = Url::parse("http://example.com/").unwrap();
            FrontierEntry::child(url, depth, &parent)
        }
    }

    #[test]
    fn test_offer_deduplicates() {
        let frontier = Frontier::new(3, 100);
        assert!(frontier.offer(entry("http://example.com/a", 1)));
        assert!(!frontier.offer(entry("http://example.com/a", 1)));
        // Fragment-only difference normalizes to the same URL
        assert!(!frontier.offer(entry("http://example.com/a#x", 2)));
        assert_eq!(frontier.visited_count(), 1);
    }

    #[test]
    fn test_offer_rejects_beyond_max_depth() {
        let frontier = Frontier::new(1, 100);
        assert!(frontier.offer(entry("http://example.com/ok", 1)));
        assert!(!frontier.offer(entry("http://example.com/deep", 2)));
    }

    #[test]
    fn test_offer_respects_max_pages() {
        let frontier = Frontier::new(5, 2);
        assert!(frontier.offer(entry("http://example.com/1", 0)));
        assert!(frontier.offer(entry("http://example.com/2", 1)));
        assert!(!frontier.offer(entry("http://example.com/3", 1)));
    }

    #[tokio::test]
    async fn test_take_returns_drained_when_empty() {
        let frontier = Frontier::new(2, 100);
        match frontier.take().await {
            TakeOutcome::Drained => {}
            TakeOutcome::Entry(_) => panic!("expected drained"),
        }
    }

    #[tokio::test]
    async fn test_take_is_fifo() {
        let frontier = Frontier::new(2, 100);
        frontier.offer(entry("http://example.com/first", 0));
        frontier.offer(entry("http://example.com/second", 1));

        let first = match frontier.take().await {
            TakeOutcome::Entry(e) => e,
            TakeOutcome::Drained => panic!("expected entry"),
        };
        assert_eq!(first.url.path(), "/first");
        frontier.complete();
    }

    #[tokio::test]
    async fn test_waiting_taker_wakes_on_drain() {
        let frontier = Arc::new(Frontier::new(2, 100));
        frontier.offer(entry("http://example.com/only", 0));

        // Consume the only entry, leaving one in-flight fetch
        let _ = frontier.take().await;

        let waiter = {
            let frontier = frontier.clone();
            tokio::spawn(async move { frontier.take().await })
        };

        // The waiter blocks until the in-flight fetch completes
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        frontier.complete();

        match waiter.await.unwrap() {
            TakeOutcome::Drained => {}
            TakeOutcome::Entry(_) => panic!("expected drained"),
        }
    }

    #[tokio::test]
    async fn test_concurrent_offers_never_overshoot_max_pages() {
        let frontier = Arc::new(Frontier::new(2, 5));
        let mut handles = Vec::new();
        for i in 0..32 {
            let frontier = frontier.clone();
            handles.push(tokio::spawn(async move {
                frontier.offer(entry(&format!("http://example.com/p{}", i), 1))
            }));
        }
        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 5);
        assert_eq!(frontier.visited_count(), 5);
    }

    #[tokio::test]
    async fn test_concurrent_offers_enqueue_once() {
        let frontier = Arc::new(Frontier::new(2, 1000));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let frontier = frontier.clone();
            handles.push(tokio::spawn(async move {
                frontier.offer(entry("http://example.com/shared", 1))
            }));
        }
        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
    }
}
