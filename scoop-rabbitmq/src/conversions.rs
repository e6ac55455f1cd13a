//! Translation between lapin's wire types and the broker-agnostic core types.

use lapin::{
    message::Delivery as AmqpDelivery,
    types::{
        AMQPValue, ByteArray, DecimalValue, FieldArray, FieldTable, LongLongInt, LongString,
        ShortString,
    },
    BasicProperties,
};
use scoop_core::{
    ArgValue, Delivery, Envelope, HeaderValue, Headers, MessageProperties, QueueArguments,
};

// ==========================================
// 1. INGRESS: AMQP -> CORE
// ==========================================

pub fn delivery_from_amqp(delivery: AmqpDelivery) -> Delivery {
    Delivery {
        tag: delivery.delivery_tag,
        redelivered: delivery.redelivered,
        envelope: Envelope {
            properties: properties_from_amqp(&delivery.properties),
            body: delivery.data,
        },
    }
}

fn short(value: &Option<ShortString>) -> Option<String> {
    value.as_ref().map(|s| s.as_str().to_string())
}

pub fn properties_from_amqp(props: &BasicProperties) -> MessageProperties {
    MessageProperties {
        content_type: short(props.content_type()),
        content_encoding: short(props.content_encoding()),
        delivery_mode: *props.delivery_mode(),
        priority: *props.priority(),
        correlation_id: short(props.correlation_id()),
        reply_to: short(props.reply_to()),
        expiration: short(props.expiration()),
        message_id: short(props.message_id()),
        timestamp: *props.timestamp(),
        kind: short(props.kind()),
        user_id: short(props.user_id()),
        app_id: short(props.app_id()),
        headers: props.headers().as_ref().map(table_from_amqp),
    }
}

pub fn table_from_amqp(table: &FieldTable) -> Headers {
    table
        .inner()
        .iter()
        .map(|(key, value)| (key.as_str().to_string(), value_from_amqp(value)))
        .collect()
}

pub fn value_from_amqp(value: &AMQPValue) -> HeaderValue {
    match value {
        AMQPValue::Boolean(v) => HeaderValue::Bool(*v),
        AMQPValue::ShortShortInt(v) => HeaderValue::I8(*v),
        AMQPValue::ShortShortUInt(v) => HeaderValue::U8(*v),
        AMQPValue::ShortInt(v) => HeaderValue::I16(*v),
        AMQPValue::ShortUInt(v) => HeaderValue::U16(*v),
        AMQPValue::LongInt(v) => HeaderValue::I32(*v),
        AMQPValue::LongUInt(v) => HeaderValue::U32(*v),
        AMQPValue::LongLongInt(v) => HeaderValue::I64(*v),
        AMQPValue::Float(v) => HeaderValue::F32(*v),
        AMQPValue::Double(v) => HeaderValue::F64(*v),
        AMQPValue::DecimalValue(d) => HeaderValue::Decimal {
            scale: d.scale,
            value: d.value,
        },
        AMQPValue::ShortString(s) => HeaderValue::ShortString(s.as_str().to_string()),
        AMQPValue::LongString(s) => HeaderValue::LongString(s.as_bytes().to_vec()),
        AMQPValue::FieldArray(a) => {
            HeaderValue::Array(a.as_slice().iter().map(value_from_amqp).collect())
        }
        AMQPValue::Timestamp(t) => HeaderValue::Timestamp(*t),
        AMQPValue::FieldTable(t) => HeaderValue::Table(table_from_amqp(t)),
        AMQPValue::ByteArray(b) => HeaderValue::Bytes(b.as_slice().to_vec()),
        AMQPValue::Void => HeaderValue::Void,
    }
}

// ==========================================
// 2. EGRESS: CORE -> AMQP
// ==========================================

pub fn properties_to_amqp(props: &MessageProperties) -> BasicProperties {
    let mut out = BasicProperties::default();
    if let Some(v) = &props.content_type {
        out = out.with_content_type(v.as_str().into());
    }
    if let Some(v) = &props.content_encoding {
        out = out.with_content_encoding(v.as_str().into());
    }
    if let Some(v) = props.delivery_mode {
        out = out.with_delivery_mode(v);
    }
    if let Some(v) = props.priority {
        out = out.with_priority(v);
    }
    if let Some(v) = &props.correlation_id {
        out = out.with_correlation_id(v.as_str().into());
    }
    if let Some(v) = &props.reply_to {
        out = out.with_reply_to(v.as_str().into());
    }
    if let Some(v) = &props.expiration {
        out = out.with_expiration(v.as_str().into());
    }
    if let Some(v) = &props.message_id {
        out = out.with_message_id(v.as_str().into());
    }
    if let Some(v) = props.timestamp {
        out = out.with_timestamp(v);
    }
    if let Some(v) = &props.kind {
        out = out.with_kind(v.as_str().into());
    }
    if let Some(v) = &props.user_id {
        out = out.with_user_id(v.as_str().into());
    }
    if let Some(v) = &props.app_id {
        out = out.with_app_id(v.as_str().into());
    }
    if let Some(headers) = &props.headers {
        out = out.with_headers(table_to_amqp(headers));
    }
    out
}

pub fn table_to_amqp(headers: &Headers) -> FieldTable {
    let mut table = FieldTable::default();
    for (key, value) in headers {
        table.insert(ShortString::from(key.clone()), value_to_amqp(value));
    }
    table
}

pub fn value_to_amqp(value: &HeaderValue) -> AMQPValue {
    match value {
        HeaderValue::Bool(v) => AMQPValue::Boolean(*v),
        HeaderValue::I8(v) => AMQPValue::ShortShortInt(*v),
        HeaderValue::U8(v) => AMQPValue::ShortShortUInt(*v),
        HeaderValue::I16(v) => AMQPValue::ShortInt(*v),
        HeaderValue::U16(v) => AMQPValue::ShortUInt(*v),
        HeaderValue::I32(v) => AMQPValue::LongInt(*v),
        HeaderValue::U32(v) => AMQPValue::LongUInt(*v),
        HeaderValue::I64(v) => AMQPValue::LongLongInt(*v),
        HeaderValue::F32(v) => AMQPValue::Float(*v),
        HeaderValue::F64(v) => AMQPValue::Double(*v),
        HeaderValue::Decimal { scale, value } => AMQPValue::DecimalValue(DecimalValue {
            scale: *scale,
            value: *value,
        }),
        HeaderValue::ShortString(s) => AMQPValue::ShortString(ShortString::from(s.clone())),
        HeaderValue::LongString(bytes) => AMQPValue::LongString(LongString::from(bytes.clone())),
        HeaderValue::Array(items) => {
            let mut array = FieldArray::default();
            for item in items {
                array.push(value_to_amqp(item));
            }
            AMQPValue::FieldArray(array)
        }
        HeaderValue::Timestamp(t) => AMQPValue::Timestamp(*t),
        HeaderValue::Table(t) => AMQPValue::FieldTable(table_to_amqp(t)),
        HeaderValue::Bytes(bytes) => AMQPValue::ByteArray(ByteArray::from(bytes.clone())),
        HeaderValue::Void => AMQPValue::Void,
    }
}

/// Integer arguments go out as signed 64-bit values.
pub fn arguments_to_table(arguments: &QueueArguments) -> FieldTable {
    let mut table = FieldTable::default();
    for (key, value) in arguments.iter() {
        let value = match value {
            ArgValue::Str(s) => AMQPValue::LongString(s.as_str().into()),
            ArgValue::Int(n) => AMQPValue::LongLongInt(LongLongInt::from(*n)),
        };
        table.insert(key.as_str().into(), value);
    }
    table
}
