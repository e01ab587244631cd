// 領域層：資料模型與對外介面 (ports)

pub mod model;
pub mod ports;
