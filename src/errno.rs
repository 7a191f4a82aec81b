// 探测与枚举操作错误码，0 表示成功
#[repr(i32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Errno {
    Ok = 0,            // 成功
    InvalidArg = 1,    // 参数无效
    ProbeDisagree = 2, // 标记模式间无多数一致，布局不可判定
    QueryFailed = 3,   // 不透明查询调用返回非成功状态
    BadRecord = 4,     // 记录字段越界，无法解析
    EnumFailed = 5,    // 遍历进程模块失败
}

impl Errno {
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl From<Errno> for i32 {
    fn from(value: Errno) -> Self {
        value as i32
    }
}
