//! 配置驱动的文档校验层
//!
//! 扮演外部文档数据库的 schema 角色：字段类型转换、必填检查，
//! 不在 schema 内的字段会被丢弃。校验失败返回逐字段的结构化错误。

use serde_json::{Map, Number, Value};

/// 字段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

/// 单个字段的校验规则
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldRule {
    pub fn required(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
        }
    }

    pub fn optional(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
        }
    }
}

/// 校验失败信号，对应外部存储的 ValidationError
#[derive(Debug, Clone)]
pub struct SchemaViolation {
    pub message: String,
    pub fields: Map<String, Value>,
}

/// 文档 schema：由配置注入的规则集合
#[derive(Debug, Clone)]
pub struct DocumentSchema {
    rules: Vec<FieldRule>,
}

impl DocumentSchema {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    /// 校验并规整一份完整文档
    ///
    /// 返回的文档只含 schema 内的字段；任何一个字段出错都会收集进
    /// `fields`，整体以一条汇总 message 报告。
    pub fn validate(&self, payload: &Map<String, Value>) -> Result<Map<String, Value>, SchemaViolation> {
        let mut document = Map::new();
        let mut violations = Map::new();

        for rule in &self.rules {
            match payload.get(&rule.name) {
                Some(value) => match cast(value, rule.kind) {
                    Ok(cast_value) => {
                        document.insert(rule.name.clone(), cast_value);
                    }
                    Err(expected) => {
                        violations.insert(
                            rule.name.clone(),
                            Value::String(format!("{} 必须是{}", rule.name, expected)),
                        );
                    }
                },
                None if rule.required => {
                    violations.insert(
                        rule.name.clone(),
                        Value::String(format!("{} 是必填项", rule.name)),
                    );
                }
                None => {}
            }
        }

        if violations.is_empty() {
            Ok(document)
        } else {
            let names: Vec<&str> = violations.keys().map(|k| k.as_str()).collect();
            Err(SchemaViolation {
                message: format!("产品校验失败: {}", names.join(", ")),
                fields: violations,
            })
        }
    }
}

/// 按字段类型转换取值，multipart 表单里数字以文本形式到达
fn cast(value: &Value, kind: FieldKind) -> Result<Value, &'static str> {
    match kind {
        FieldKind::Text => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err("文本"),
        },
        FieldKind::Number => match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or("数字"),
            _ => Err("数字"),
        },
    }
}
