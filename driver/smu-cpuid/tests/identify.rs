use smu_cpuid::{
    Codename, CpuidResult, CpuidSource, IdentifyError, LEAF_01H, LEAF_8000_0001H, PackageType,
    decode, identify,
};

/// Answers leaf `01h` and leaf `8000_0001h` from fixed register images.
struct Signature {
    eax: u32,
    pkg: u8,
}

impl Signature {
    /// Builds a leaf 1 EAX for an AMD part (base family 0xF).
    const fn zen(family: u16, model: u8, stepping: u8, pkg: u8) -> Self {
        let ext_family = (family - 0x0F) as u32;
        let eax = (ext_family << 20)
            | (((model >> 4) as u32) << 16)
            | (0x0F << 8)
            | (((model & 0x0F) as u32) << 4)
            | stepping as u32;
        Self { eax, pkg }
    }
}

impl CpuidSource for Signature {
    fn cpuid(&self, leaf: u32, _subleaf: u32) -> CpuidResult {
        match leaf {
            LEAF_01H => CpuidResult {
                eax: self.eax,
                ..CpuidResult::default()
            },
            LEAF_8000_0001H => CpuidResult {
                ebx: u32::from(self.pkg) << 28,
                ..CpuidResult::default()
            },
            _ => CpuidResult::default(),
        }
    }
}

#[test]
fn identifies_matisse() {
    let cpu = identify(&Signature::zen(0x17, 0x71, 0, 2)).unwrap();
    assert_eq!(cpu.family, 0x17);
    assert_eq!(cpu.model, 0x71);
    assert_eq!(cpu.package, PackageType::Am4);
    assert_eq!(cpu.codename, Codename::Matisse);
}

#[test]
fn identifies_zen3_models() {
    for (model, expected) in [
        (0x01, Codename::Milan),
        (0x20, Codename::Vermeer),
        (0x21, Codename::Vermeer),
        (0x40, Codename::Rembrandt),
        (0x50, Codename::Cezanne),
    ] {
        let cpu = identify(&Signature::zen(0x19, model, 2, 2)).unwrap();
        assert_eq!(cpu.codename, expected, "model {model:#x}");
    }
}

#[test]
fn package_type_splits_same_silicon() {
    assert_eq!(
        decode(0x17, 0x01, PackageType::Sp3r2),
        Ok(Codename::Threadripper)
    );
    assert_eq!(
        decode(0x17, 0x01, PackageType::Am4),
        Ok(Codename::SummitRidge)
    );
    assert_eq!(decode(0x17, 0x08, PackageType::Sp3r2), Ok(Codename::Colfax));
    assert_eq!(
        decode(0x17, 0x08, PackageType::Am4),
        Ok(Codename::PinnacleRidge)
    );
    assert_eq!(
        decode(0x17, 0x18, PackageType::Am4),
        Ok(Codename::RavenRidge2)
    );
    assert_eq!(decode(0x17, 0x18, PackageType::Fp5), Ok(Codename::Picasso));
}

#[test]
fn unknown_model_is_rejected() {
    let err = identify(&Signature::zen(0x17, 0x42, 0, 2)).unwrap_err();
    assert_eq!(
        err,
        IdentifyError::UnknownModel {
            family: 0x17,
            model: 0x42
        }
    );
}

#[test]
fn unknown_family_is_rejected() {
    let err = identify(&Signature::zen(0x1A, 0x01, 0, 2)).unwrap_err();
    assert_eq!(err, IdentifyError::UnsupportedFamily { family: 0x1A });
}

#[test]
fn never_produces_undefined() {
    for family in [0x17u16, 0x19] {
        for model in 0..=u8::MAX {
            for pkg in 0..16 {
                if let Ok(codename) = decode(family, model, PackageType::from_raw(pkg)) {
                    assert_ne!(codename, Codename::Undefined);
                }
            }
        }
    }
}
