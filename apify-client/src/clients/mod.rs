//! Concrete resource clients.

mod actor;
mod actor_version;
mod build;
mod dataset;
mod key_value_store;
mod log;
mod request_queue;
mod run;
mod schedule;
mod task;
mod user;
mod webhook;
mod webhook_dispatch;

pub use actor::{ActorBuildOptions, ActorClient, ActorCollectionClient, RunStartOptions};
pub use actor_version::{ActorVersionClient, ActorVersionCollectionClient};
pub use build::{BuildClient, BuildCollectionClient};
pub use dataset::{DatasetClient, DatasetCollectionClient, DatasetItemsOptions, DownloadFormat};
pub use key_value_store::{
    KeyValueStoreClient, KeyValueStoreCollectionClient, KeyValueStoreRecord, ListKeysOptions,
    SetRecordOptions,
};
pub use log::LogClient;
pub use request_queue::{RequestQueueClient, RequestQueueCollectionClient};
pub use run::{MetamorphOptions, ResurrectOptions, RunClient, RunCollectionClient};
pub use schedule::{ScheduleClient, ScheduleCollectionClient};
pub use task::{TaskClient, TaskCollectionClient};
pub use user::{ME_USER_ID, UserClient};
pub use webhook::{WebhookClient, WebhookCollectionClient};
pub use webhook_dispatch::{WebhookDispatchClient, WebhookDispatchCollectionClient};
