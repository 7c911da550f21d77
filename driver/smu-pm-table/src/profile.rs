use smu_cpuid::Codename;

/// Command sequences that return the PM table DRAM base.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DramBaseClass {
    /// One command, `args[0] = args[1] = 1`; the answer is a 64-bit address
    /// in the first two words.
    Combined { opcode: u32 },
    /// `0x0B` then `0x0C`, both without arguments; the second answers with
    /// the address.
    Indirect,
    /// A five-command sequence returning two independent 32-bit bases.
    Split,
}

/// Table byte length as a function of the firmware's table format.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TableLayout {
    /// One region whose length is looked up by format identifier.
    Versioned(&'static [(u32, usize)]),
    /// Two regions of fixed length.
    Split { primary: usize, secondary: usize },
}

/// The "transfer table to DRAM" command.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RefreshCommand {
    pub opcode: u32,
    pub arg0: u32,
}

/// How PM table access works on one processor generation.
///
/// Fields are `None` where the generation does not support the step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Profile {
    pub codename: Codename,
    pub dram_base: Option<DramBaseClass>,
    /// Opcode of the table format identifier query.
    pub format_query: Option<u32>,
    pub layout: Option<TableLayout>,
    pub refresh: Option<RefreshCommand>,
}

const MATISSE: &[(u32, usize)] = &[
    (0x0024_0902, 0x514),
    (0x0024_0903, 0x518),
    (0x0024_0802, 0x7E0),
    (0x0024_0803, 0x7E4),
];

const VERMEER: &[(u32, usize)] = &[
    (0x002D_0903, 0x594),
    (0x0038_0904, 0x5A4),
    (0x0038_0905, 0x5D0),
    (0x002D_0803, 0x894),
    (0x0038_0804, 0x8A4),
    (0x0038_0805, 0x8F0),
];

const MILAN: &[(u32, usize)] = &[(0x002D_0008, 0x1AB0)];

const RENOIR: &[(u32, usize)] = &[
    (0x0037_0000, 0x794),
    (0x0037_0001, 0x884),
    (0x0037_0002, 0x88C),
    (0x0037_0003, 0x88C),
    (0x0037_0004, 0x8AC),
    (0x0037_0005, 0x8C8),
];

const CEZANNE: &[(u32, usize)] = &[(0x0040_0005, 0x944)];

const APU_SPLIT: TableLayout = TableLayout::Split {
    primary: 0x608,
    secondary: 0xA4,
};

impl Profile {
    #[must_use]
    pub const fn of(codename: Codename) -> Self {
        let dram_base = match codename {
            Codename::Vermeer | Codename::Matisse | Codename::CastlePeak | Codename::Milan => {
                Some(DramBaseClass::Combined { opcode: 0x06 })
            }
            Codename::Renoir | Codename::Cezanne => Some(DramBaseClass::Combined { opcode: 0x66 }),
            Codename::Colfax | Codename::PinnacleRidge => Some(DramBaseClass::Indirect),
            Codename::Dali | Codename::Picasso | Codename::RavenRidge | Codename::RavenRidge2 => {
                Some(DramBaseClass::Split)
            }
            _ => None,
        };

        let format_query = match codename {
            Codename::RavenRidge | Codename::Picasso => Some(0x0C),
            Codename::Matisse | Codename::Vermeer | Codename::Milan => Some(0x08),
            Codename::Renoir | Codename::Cezanne => Some(0x06),
            _ => None,
        };

        let layout = match codename {
            Codename::Matisse => Some(TableLayout::Versioned(MATISSE)),
            Codename::Vermeer => Some(TableLayout::Versioned(VERMEER)),
            Codename::Milan => Some(TableLayout::Versioned(MILAN)),
            Codename::Renoir => Some(TableLayout::Versioned(RENOIR)),
            Codename::Cezanne => Some(TableLayout::Versioned(CEZANNE)),
            Codename::Picasso | Codename::RavenRidge | Codename::RavenRidge2 => Some(APU_SPLIT),
            _ => None,
        };

        let refresh = match codename {
            Codename::Matisse | Codename::Vermeer | Codename::Milan => Some(RefreshCommand {
                opcode: 0x05,
                arg0: 0,
            }),
            Codename::Cezanne => Some(RefreshCommand {
                opcode: 0x65,
                arg0: 0,
            }),
            Codename::Renoir => Some(RefreshCommand {
                opcode: 0x65,
                arg0: 3,
            }),
            Codename::Picasso | Codename::RavenRidge | Codename::RavenRidge2 => {
                Some(RefreshCommand {
                    opcode: 0x3D,
                    arg0: 3,
                })
            }
            _ => None,
        };

        Self {
            codename,
            dram_base,
            format_query,
            layout,
            refresh,
        }
    }

    /// Whether the table can be located, sized and refreshed at all.
    #[must_use]
    pub const fn supports_pm_table(&self) -> bool {
        self.dram_base.is_some() && self.layout.is_some() && self.refresh.is_some()
    }
}
