//! Dump the named register map's concrete byte-address layout.

use clap::Args;
use phaser_link::{Field, RegisterFile, RegisterMap};

/// Print the register map for a given channel/profile count.
#[derive(Args)]
pub struct RegistersArgs {
    /// Number of DUC/servo channels.
    #[arg(long, default_value_t = 2)]
    pub channels: usize,

    /// Number of IIR profiles per channel.
    #[arg(long, default_value_t = 1)]
    pub profiles: usize,
}

pub fn run(args: RegistersArgs) -> anyhow::Result<()> {
    let mut file = RegisterFile::new();
    let map = RegisterMap::build(&mut file, args.channels, args.profiles.max(1));

    println!("{:<24} {:>5} {:>6} {:>10}", "register", "base", "width", "access");
    println!("{}", "-".repeat(50));

    print_field("cfg", &map.cfg);
    print_field("sta", &map.sta);
    print_field("duc_stb", &map.duc_stb);

    for (i, d) in map.duc.iter().enumerate() {
        print_field(&format!("duc{i}_cfg"), &d.cfg);
        print_field(&format!("duc{i}_f"), &d.f);
        print_field(&format!("duc{i}_p"), &d.p);
        print_field(&format!("dac{i}_data"), &d.dac_data);
        print_field(&format!("dac{i}_test"), &d.dac_test);
    }

    for (i, s) in map.servo.iter().enumerate() {
        print_field(&format!("servo{i}_cfg"), &s.cfg);
        for (p, fields) in s.profiles.iter().enumerate() {
            print_field(&format!("ch{i}_profile{p}_b0"), &fields[0]);
            print_field(&format!("ch{i}_profile{p}_b1"), &fields[1]);
            print_field(&format!("ch{i}_profile{p}_a0"), &fields[2]);
            print_field(&format!("ch{i}_profile{p}_offset"), &fields[3]);
        }
    }

    print_field("fft_load", &map.pulsegen.fft_load);
    print_field("fft_start", &map.pulsegen.fft_start);
    print_field("fft_busy", &map.pulsegen.fft_busy);
    print_field("fft_shiftmask", &map.pulsegen.fft_shiftmask);
    print_field("interpolation_rate", &map.pulsegen.interpolation_rate);
    print_field("pulse_trigger", &map.pulsegen.pulse_trigger);
    print_field("pulse_settings", &map.pulsegen.pulse_settings);
    print_field("repeater", &map.pulsegen.repeater);
    print_field("pulsegen_busy", &map.pulsegen.pulsegen_busy);

    Ok(())
}

fn print_field(name: &str, field: &Field) {
    println!("{:<24} {:>5} {:>6} {:>10?}", name, field.base, field.width, field.access);
}
