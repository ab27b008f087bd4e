use accessory::{Accessory, Adapter, MiioConnector, Value};
use mirobo::{handle_request, read_config, Error, Result, Topic, TopicKind, DEFAULT_TOPIC_PREFIX};

use std::process;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::StreamExt;
use log::{debug, error, info, warn};
use paho_mqtt as mqtt;
use tokio::sync::broadcast::error::RecvError;
use tokio::task;
use tokio::time;

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init_timed();

    let config = read_config()?;
    let adapter = Arc::new(Adapter::new(&config, Arc::new(MiioConnector::default()))?);
    info!("starting {}", adapter.name());

    let prefix =
        std::env::var("MQTT_TOPIC_PREFIX").unwrap_or_else(|_| DEFAULT_TOPIC_PREFIX.to_string());

    let mqtt_address = env("MQTT_ADDRESS")?;
    let mqtt_username = std::env::var("MQTT_USER").ok();
    let mqtt_password = std::env::var("MQTT_PASS").ok();
    let mqtt_client = connect_mqtt(mqtt_address, mqtt_username, mqtt_password).await?;
    info!("connected mqtt");

    let (request_handle, publish_handle) = tokio::try_join!(
        task::spawn(subscribe_requests(
            mqtt_client.clone(),
            adapter.clone(),
            prefix.clone()
        )),
        task::spawn(publish_notifications(mqtt_client, adapter, prefix))
    )?;

    request_handle?;
    publish_handle?;

    Ok(())
}

fn env(name: &'static str) -> std::result::Result<String, Error> {
    std::env::var(name).map_err(|_| Error::MissingVariable(name))
}

async fn connect_mqtt(
    address: String,
    username: Option<String>,
    password: Option<String>,
) -> Result<mqtt::AsyncClient> {
    let create_opts = mqtt::CreateOptionsBuilder::new_v3()
        .server_uri(address)
        .client_id("mirobo")
        .finalize();

    let client = mqtt::AsyncClient::new(create_opts).unwrap_or_else(|err| {
        error!("Error creating the client: {}", err);
        process::exit(1);
    });

    let mut conn_opts = mqtt::ConnectOptionsBuilder::new_v3();
    conn_opts
        .keep_alive_interval(Duration::from_secs(30))
        .clean_session(false);

    if let Some(username) = username {
        conn_opts.user_name(username);
    }

    if let Some(password) = password {
        conn_opts.password(password);
    }

    client.connect(conn_opts.finalize()).await?;

    Ok(client)
}

async fn subscribe_requests(
    mut mqtt: mqtt::AsyncClient,
    adapter: Arc<Adapter>,
    prefix: String,
) -> Result<()> {
    let mut stream = mqtt.get_stream(None);

    let filters = Topic::request_filters(&prefix);
    mqtt.subscribe_many(&filters, &[mqtt::QOS_1; 2]);
    info!("Subscribed to topics: {:?}", filters);

    while let Some(msg_opt) = stream.next().await {
        let Some(msg) = msg_opt else {
            time::sleep(Duration::from_secs(1)).await;
            error!("Lost MQTT connection. Attempting reconnect.");
            while let Err(err) = mqtt.reconnect().await {
                error!("Error MQTT reconnecting: {}", err);
                time::sleep(Duration::from_secs(1)).await;
            }
            continue;
        };

        debug!("got message {:?}", msg);

        let topic = match Topic::from_str(msg.topic()) {
            Ok(topic) => topic,
            Err(err) => {
                warn!("{}", err);
                continue;
            }
        };

        match handle_request(adapter.as_ref(), &topic, msg.payload()).await {
            Ok(Some(value)) => publish(&mqtt, &topic.value(), &value).await?,
            Ok(None) => (),
            Err(err) => error!("Error handling {}: {}", topic, err),
        }
    }

    Ok(())
}

async fn publish_notifications(
    mqtt: mqtt::AsyncClient,
    adapter: Arc<Adapter>,
    prefix: String,
) -> Result<()> {
    let mut notifications = adapter.subscribe();

    loop {
        match notifications.recv().await {
            Ok(notification) => {
                let topic = Topic::new(&prefix, notification.id, TopicKind::Value);
                publish(&mqtt, &topic, &notification.value).await?;
            }
            Err(RecvError::Lagged(skipped)) => warn!("skipped {} notifications", skipped),
            Err(RecvError::Closed) => return Ok(()),
        }
    }
}

async fn publish(mqtt: &mqtt::AsyncClient, topic: &Topic, value: &Value) -> Result<()> {
    info!("publishing {} = {:?}", topic, value);

    let payload = serde_json::to_vec(value)?;

    let message = mqtt::MessageBuilder::new()
        .topic(topic.to_string())
        .payload(payload)
        .retained(true)
        .qos(mqtt::QOS_1)
        .finalize();

    mqtt.publish(message).await?;

    Ok(())
}
