// ==========================================
// 配置状态构建器 - 用于集成测试
// ==========================================

use product_configurator::domain::measure::Measure;
use product_configurator::domain::state::{ConfigurationState, ConfirmedOption, ProductDescriptor};

pub struct StateBuilder {
    state: ConfigurationState,
}

impl StateBuilder {
    pub fn new(product_id: i64) -> Self {
        Self {
            state: ConfigurationState::new(ProductDescriptor::new(product_id, "Janela de correr")),
        }
    }

    pub fn measure(mut self, width: f64, height: f64) -> Self {
        let id = self.state.measures.len() as i64 + 1;
        self.state.add_measure(Measure::new(id, width, height));
        self
    }

    pub fn model(mut self, model: i64) -> Self {
        self.state.set_model(Some(model));
        self
    }

    pub fn confirm(mut self, group: i64, composition: i64, optional: i64) -> Self {
        self.state
            .confirm_option(ConfirmedOption::new(group, composition, optional));
        self
    }

    pub fn confirm_colored(
        mut self,
        group: i64,
        composition: i64,
        optional: i64,
        combination: i64,
        color: i64,
    ) -> Self {
        self.state.confirm_option(
            ConfirmedOption::new(group, composition, optional)
                .with_combination(combination, Some(color)),
        );
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.state.set_quantity(quantity);
        self
    }

    pub fn build(self) -> ConfigurationState {
        self.state
    }
}
