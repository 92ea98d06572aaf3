use crossbeam_channel::{Sender, TrySendError};
use log::{debug, warn};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

/// Задание не принято в очередь; владение возвращается вызывающему.
#[derive(Debug)]
pub(crate) enum Rejected<T> {
    /// все воркеры заняты и очередь заполнена
    Full(T),
    /// пул уже остановлен
    Closed(T),
}

/// Фиксированный набор потоков, читающих задания из bounded очереди.
pub(crate) struct WorkerPool<T: Send + 'static> {
    tx: Option<Sender<T>>,
    handles: Vec<thread::JoinHandle<()>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    pub(crate) fn start<F>(workers: usize, queue_capacity: usize, handler: F) -> io::Result<Self>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded::<T>(queue_capacity);
        let handler = Arc::new(handler);
        let mut handles = Vec::with_capacity(workers);

        for i in 0..workers {
            let rx = rx.clone();
            let handler = handler.clone();
            let h = thread::Builder::new()
                .name(format!("ticker-worker-{i}"))
                .spawn(move || {
                    // iter() завершится, когда закроют все Sender'ы
                    for job in rx.iter() {
                        // паника в обработчике не должна уменьшать пул
                        if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| handler(job))) {
                            warn!("worker {i}: handler panicked: {:?}", panic_message(&*panic));
                        }
                    }
                    debug!("worker {i} stopped");
                })?;
            handles.push(h);
        }

        Ok(Self {
            tx: Some(tx),
            handles,
        })
    }

    /// Не блокирует: при переполнении сразу отдаёт задание обратно.
    pub(crate) fn submit(&self, job: T) -> Result<(), Rejected<T>> {
        let Some(tx) = &self.tx else {
            return Err(Rejected::Closed(job));
        };

        match tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) => Err(Rejected::Full(job)),
            Err(TrySendError::Disconnected(job)) => Err(Rejected::Closed(job)),
        }
    }

    /// Закрывает очередь, даёт воркерам доделать принятое и ждёт их.
    pub(crate) fn shutdown(mut self) {
        self.close_and_join();
    }

    fn close_and_join(&mut self) {
        drop(self.tx.take());
        for h in self.handles.drain(..) {
            if let Err(panic) = h.join() {
                warn!("worker thread panicked: {:?}", panic);
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic>"
    }
}

impl<T: Send + 'static> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        self.close_and_join();
    }
}
