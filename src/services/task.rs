//! Отменяемая фоновая задача.
//!
//! [`TaskHandle`] запускает future на рантайме tokio. Пока результат не готов,
//! задачу можно вытеснить (`supersede`), тогда её результат никуда не попадёт.
//! Удаление хэндла тоже вытесняет задачу. Получатель дополнительно сверяет
//! номер поколения: результат, проскочивший мимо отмены, игнорируется.

use std::future::Future;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::trace;

#[derive(Debug)]
pub struct TaskHandle {
    generation: u64,
    token: CancellationToken,
}

impl TaskHandle {
    /// Запускает `future`; по завершении отправляет `wrap(generation, output)` в `sender`,
    /// если задачу не вытеснили раньше.
    pub fn spawn<F, M, W>(generation: u64, future: F, sender: UnboundedSender<M>, wrap: W) -> Self
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
        M: Send + 'static,
        W: FnOnce(u64, F::Output) -> M + Send + 'static,
    {
        let token = CancellationToken::new();
        let child = token.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = child.cancelled() => {
                    trace!("task {} superseded before settling", generation);
                }
                output = future => {
                    if !child.is_cancelled() {
                        // Получатель мог уйти, тогда результат никому не нужен.
                        let _ = sender.send(wrap(generation, output));
                    }
                }
            }
        });

        Self { generation, token }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn supersede(&self) {
        self.token.cancel();
    }

    pub fn is_superseded(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn settled_task_delivers_output() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = TaskHandle::spawn(1, async { 42 }, tx, |generation, value| (generation, value));
        assert_eq!(rx.recv().await, Some((1, 42)));
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_task_is_silent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = TaskHandle::spawn(
            1,
            async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                "late"
            },
            tx.clone(),
            |generation, value| (generation, value),
        );
        handle.supersede();
        assert!(handle.is_superseded());

        let _second = TaskHandle::spawn(2, async { "fresh" }, tx, |generation, value| (generation, value));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(rx.recv().await, Some((2, "fresh")));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_supersedes() {
        let (tx, mut rx) = mpsc::unbounded_channel::<(u64, u8)>();
        {
            let _handle = TaskHandle::spawn(
                7,
                async {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    1
                },
                tx,
                |generation, value| (generation, value),
            );
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        // Отправитель ушёл вместе с задачей, канал закрыт без сообщений.
        assert_eq!(rx.recv().await, None);
    }
}
