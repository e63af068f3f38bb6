//! # 产品管理 HTTP 服务
//!
//! 提供产品记录的列表、创建、更新接口，支持单张图片附件：
//! - 图片先流式暂存到系统临时目录，数据库写入前再搬迁到配置的上传目录
//! - 文档校验失败时删除刚搬迁的孤儿文件再响应
//! - 文档校验规则由配置注入，存储层本身不关心具体业务字段

pub mod app;
pub mod core;
pub mod infrastructure;
