//! RangeDown: 基于原始 TCP 套接字和手写 HTTP/1.1 报文的批量下载器
//!
//! 先下载索引文件，再逐个下载其中列出的目标；单个目标可以按字节范围
//! 切分给多个并发连接，下载完成后按范围顺序拼接。

pub mod cli;
pub mod config;
pub mod core;
pub mod ui;
pub mod utils;
