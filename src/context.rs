// 进程级探测上下文：显式构造、显式持有，不依赖环境全局状态
//
// 上下文内部不含锁。同一块硬件资源上的探测与枚举必须由调用方串行化，
// 两个线程并发驱动同一个查询函数属于未定义行为
use crate::ee::{EeQuery, EeRegistry};
use crate::errno::Errno;
use crate::log;
use crate::maps::ModuleMap;

pub struct ProbeContext<Q: EeQuery> {
    pub maps: ModuleMap,
    pub ees: EeRegistry<Q>,
}

impl<Q: EeQuery> ProbeContext<Q> {
    // 在进程映像稳定点构建；模块映射构建失败则整体失败
    pub fn new(query: Q) -> Result<Self, Errno> {
        let maps = ModuleMap::build()?;
        log::info(format_args!(
            "probe context ready version={}",
            crate::version::version_str()
        ));
        Ok(Self {
            maps,
            ees: EeRegistry::new(query),
        })
    }

    // 模块发生动态加载/卸载后快照过期，由调用方决定何时重建
    // 重建失败时保留旧快照
    pub fn rebuild_maps(&mut self) -> Result<(), Errno> {
        self.maps = ModuleMap::build()?;
        Ok(())
    }
}
