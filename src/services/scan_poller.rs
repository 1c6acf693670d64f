use super::store::{PollSlot, Store};

/// 轮询互斥标志的持有者，在 spawn 之前创建并移入任务
///
/// 任务在首次运行前就被 abort 时，guard 随 future 一起 drop，同样会清除标志。
/// drop 时若句柄槽仍属于本轮循环，一并清空。
struct PollingGuard {
    store: Store,
    generation: u64,
    armed: bool,
}

impl PollingGuard {
    /// 正常退出时标志已在检查终态的同一临界区内清除，无需再清
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PollingGuard {
    fn drop(&mut self) {
        if self.armed {
            self.store.inner.state.send_modify(|s| s.scan_polling = false);
        }
        let mut slot = self.store.lock_poll_slot();
        if slot.generation == self.generation {
            slot.handle = None;
        }
    }
}

impl Store {
    /// 发起全市场扫描，并在没有轮询运行时启动轮询
    ///
    /// 新任务直接替换旧任务记录；若已有轮询循环在运行，不会再开第二个，
    /// 现有循环会在下一轮读取到新任务 ID。
    pub async fn start_scan(&self, limit: u32) -> bool {
        let task = match self.inner.api.start_scan(limit).await {
            Ok(task) => task,
            Err(err) => {
                self.record_error("发起扫描", err);
                return false;
            }
        };

        log::info!("扫描任务已创建: {} (共 {} 只)", task.task_id, task.total);
        self.inner.state.send_modify(|s| s.scan_task = Some(task));

        if self.try_acquire_polling() {
            self.spawn_poll_loop();
        } else {
            log::debug!("轮询已在运行，沿用现有循环");
        }
        true
    }

    /// 立即停止轮询（任务记录保持最后一次结果）
    pub async fn stop_scan_polling(&self) {
        let handle = self.lock_poll_slot().handle.take();

        if let Some(handle) = handle {
            handle.abort();
            // 等待任务真正结束，PollingGuard 在 drop 时清除标志
            let _ = handle.await;
        }
    }

    /// 当前是否持有轮询任务句柄（循环结束后句柄会被释放）
    pub fn has_poll_task(&self) -> bool {
        self.lock_poll_slot().handle.is_some()
    }

    fn lock_poll_slot(&self) -> std::sync::MutexGuard<'_, PollSlot> {
        self.inner.poll_slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn try_acquire_polling(&self) -> bool {
        self.inner.state.send_if_modified(|s| {
            if s.scan_polling {
                false
            } else {
                s.scan_polling = true;
                true
            }
        })
    }

    fn spawn_poll_loop(&self) {
        let generation = {
            let mut slot = self.lock_poll_slot();
            slot.generation += 1;
            slot.generation
        };
        let guard = PollingGuard {
            store: self.clone(),
            generation,
            armed: true,
        };
        // spawn 时不持锁：运行时关闭时 future 会被立即 drop，guard 需要拿锁
        let handle = tokio::spawn(run_poll_loop(guard));

        let mut slot = self.lock_poll_slot();
        if slot.generation == generation && !handle.is_finished() {
            slot.handle = Some(handle);
        }
    }

    /// 取下一轮要查询的任务 ID；任务已终态（或不存在）时在同一临界区内释放标志
    fn next_poll_target(&self, guard: &mut PollingGuard) -> Option<String> {
        let mut target = None;
        self.inner.state.send_if_modified(|s| {
            match s.scan_task.as_ref().filter(|t| t.is_active()) {
                Some(task) => {
                    target = Some(task.task_id.clone());
                    false
                }
                None => {
                    s.scan_polling = false;
                    true
                }
            }
        });
        if target.is_none() {
            guard.disarm();
        }
        target
    }
}

async fn run_poll_loop(mut guard: PollingGuard) {
    let store = guard.store.clone();

    while let Some(task_id) = store.next_poll_target(&mut guard) {
        let task = match store.inner.api.get_scan_result(&task_id).await {
            Ok(task) => task,
            Err(err) => {
                // 不重试：保留最后一次已知状态
                log::warn!("扫描任务 {} 状态查询失败，停止轮询: {}", task_id, err);
                return;
            }
        };

        let terminal = task.status.is_terminal();
        log::debug!(
            "扫描任务 {}: {:?} {}/{} ({}%)",
            task_id, task.status, task.processed, task.total, task.progress
        );

        // 期间发起了新扫描时丢弃旧任务的响应
        store.inner.state.send_if_modified(|s| {
            let is_current = s.scan_task.as_ref().is_some_and(|t| t.task_id == task_id);
            if is_current {
                s.scan_task = Some(task);
            }
            is_current
        });

        if terminal {
            continue;
        }
        tokio::time::sleep(store.inner.poll_interval).await;
    }

    log::info!("扫描轮询结束");
}
